//! 预导入模块，方便使用

pub use super::class_students::{
    ActiveModel as ClassStudentActiveModel, Entity as ClassStudents, Model as ClassStudentModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::question_options::{
    ActiveModel as QuestionOptionActiveModel, Entity as QuestionOptions,
    Model as QuestionOptionModel,
};
pub use super::questions::{
    ActiveModel as QuestionActiveModel, Entity as Questions, Model as QuestionModel,
};
pub use super::test_answers::{
    ActiveModel as TestAnswerActiveModel, Entity as TestAnswers, Model as TestAnswerModel,
};
pub use super::test_assignments::{
    ActiveModel as TestAssignmentActiveModel, Entity as TestAssignments,
    Model as TestAssignmentModel,
};
pub use super::test_results::{
    ActiveModel as TestResultActiveModel, Entity as TestResults, Model as TestResultModel,
};
pub use super::tests::{ActiveModel as TestActiveModel, Entity as Tests, Model as TestModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
